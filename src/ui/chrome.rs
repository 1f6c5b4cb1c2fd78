//! The chrome page: tab strip, navigation toolbar and the built-in homepage.
//!
//! It posts [`UiIntent`](crate::types::intent::UiIntent) JSON through
//! `window.ipc.postMessage` and receives notifications and intent outcomes
//! through `window.__noxx`.

use serde::Serialize;

/// Script delivering one serializable payload to a chrome hook.
pub fn deliver<T: Serialize>(hook: &str, payload: &T) -> Option<String> {
    let json = serde_json::to_string(payload).ok()?;
    Some(format!("window.__noxx&&window.__noxx.{}({})", hook, json))
}

pub const CHROME_HTML: &str = r##"<!DOCTYPE html>
<html><head><meta charset="UTF-8"><style>
:root{--bg:#101318;--bar:#181c23;--tab:#20252e;--tab-active:#2b313c;--fg:#e6e9ef;--muted:#8a93a3;--accent:#6c8cff;--chrome:120px}
*{margin:0;padding:0;box-sizing:border-box}
body{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Helvetica,Arial,sans-serif;background:var(--bg);color:var(--fg);height:100vh;overflow:hidden;user-select:none}
#chrome{height:var(--chrome);background:var(--bar);display:flex;flex-direction:column}
#tabs{display:flex;gap:4px;padding:8px 8px 0;height:48px;align-items:flex-end}
.tab{display:flex;align-items:center;gap:6px;max-width:220px;min-width:80px;height:36px;padding:0 10px;background:var(--tab);border-radius:8px 8px 0 0;cursor:default;font-size:13px}
.tab.active{background:var(--tab-active)}
.tab .title{flex:1;overflow:hidden;white-space:nowrap;text-overflow:ellipsis}
.tab button{background:none;border:none;color:var(--muted);cursor:pointer;font-size:12px}
#new-tab{background:none;border:none;color:var(--muted);font-size:18px;padding:0 10px;cursor:pointer}
#toolbar{display:flex;gap:6px;align-items:center;padding:10px 8px;background:var(--tab-active);flex:1}
#toolbar button{background:none;border:none;color:var(--fg);font-size:16px;width:32px;height:32px;border-radius:6px;cursor:pointer}
#toolbar button:hover{background:var(--tab)}
#address{flex:1;height:34px;border-radius:17px;border:1px solid #333a46;background:var(--bg);color:var(--fg);padding:0 14px;font-size:14px;outline:none}
#address:focus{border-color:var(--accent)}
#detached{position:relative}
#detached-list{position:absolute;right:0;top:36px;background:var(--bar);border:1px solid #333a46;border-radius:8px;min-width:240px;display:none;z-index:2}
#detached-list.open{display:block}
#detached-list div{padding:8px 12px;font-size:13px;cursor:pointer}
#detached-list div:hover{background:var(--tab)}
#home{display:none;flex-direction:column;align-items:center;justify-content:center;height:calc(100vh - var(--chrome))}
#home.shown{display:flex}
#home h1{font-size:44px;font-weight:300;letter-spacing:2px;margin-bottom:24px}
#home input{width:560px;max-width:80vw;height:46px;border-radius:23px;border:1px solid #333a46;background:var(--bar);color:var(--fg);padding:0 20px;font-size:16px;outline:none}
</style></head><body>
<div id="chrome">
  <div id="tabs"></div>
  <div id="toolbar">
    <button id="back" title="Back">&#8592;</button>
    <button id="forward" title="Forward">&#8594;</button>
    <button id="reload" title="Reload">&#8635;</button>
    <input id="address" type="text" placeholder="Search or enter address" spellcheck="false">
    <span id="detached"><button id="detached-toggle" title="Detached tabs">&#10697;</button><span id="detached-list"></span></span>
  </div>
</div>
<div id="home"><h1>NoxX</h1><input id="home-search" type="text" placeholder="Search the web or enter an address"></div>
<script>
(function(){
  var state={tabs:[],activeTabId:null,detached:{}};
  var HOME='noxx://homepage';
  function post(intent){window.ipc.postMessage(JSON.stringify(intent));}
  function active(){for(var i=0;i<state.tabs.length;i++){if(state.tabs[i].id===state.activeTabId)return state.tabs[i];}return null;}
  function render(){
    var strip=document.getElementById('tabs');strip.innerHTML='';
    state.tabs.forEach(function(t,i){
      var el=document.createElement('div');el.className='tab'+(t.id===state.activeTabId?' active':'');
      el.draggable=true;el.dataset.index=i;
      var title=document.createElement('span');title.className='title';title.textContent=t.title||t.url;el.appendChild(title);
      if(t.url!==HOME){var d=document.createElement('button');d.textContent='⧉';d.title='Move to new window';
        d.onclick=function(e){e.stopPropagation();state.detached[t.id]={id:t.id,title:t.title,url:t.url};post({type:'detach',tabId:t.id});};el.appendChild(d);}
      var c=document.createElement('button');c.textContent='✕';c.title='Close';
      c.onclick=function(e){e.stopPropagation();post({type:'closeTab',id:t.id});};el.appendChild(c);
      el.onclick=function(){post({type:'switchActiveTab',id:t.id});};
      el.ondragstart=function(e){e.dataTransfer.setData('text/plain',String(i));};
      el.ondragover=function(e){e.preventDefault();};
      el.ondrop=function(e){e.preventDefault();var from=parseInt(e.dataTransfer.getData('text/plain'),10);if(!isNaN(from)&&from!==i)post({type:'reorderTabs',from:from,to:i});};
      strip.appendChild(el);
    });
    var nt=document.createElement('button');nt.id='new-tab';nt.textContent='+';nt.onclick=function(){post({type:'createTab'});};strip.appendChild(nt);
    var a=active();var addr=document.getElementById('address');
    if(document.activeElement!==addr)addr.value=(a&&a.url!==HOME)?a.url:'';
    var home=document.getElementById('home');
    if(a&&a.url===HOME)home.classList.add('shown');else home.classList.remove('shown');
    var list=document.getElementById('detached-list');list.innerHTML='';
    Object.keys(state.detached).forEach(function(id){var r=state.detached[id];var row=document.createElement('div');
      row.textContent=r.title||r.url;row.onclick=function(){post({type:'reattach',tab:r});list.classList.remove('open');};list.appendChild(row);});
  }
  function go(input){var a=active();if(!input.trim())return;if(a)post({type:'loadUrl',tabId:a.id,input:input});else post({type:'createTab',url:input});}
  document.getElementById('address').addEventListener('keydown',function(e){if(e.key==='Enter'){go(e.target.value);e.target.blur();}});
  document.getElementById('home-search').addEventListener('keydown',function(e){if(e.key==='Enter'){go(e.target.value);e.target.value='';}});
  document.getElementById('back').onclick=function(){var a=active();if(a)post({type:'goBack',tabId:a.id});};
  document.getElementById('forward').onclick=function(){var a=active();if(a)post({type:'goForward',tabId:a.id});};
  document.getElementById('reload').onclick=function(){var a=active();if(a)post({type:'reload',tabId:a.id});};
  document.getElementById('detached-toggle').onclick=function(){document.getElementById('detached-list').classList.toggle('open');};
  window.__noxx={
    receive:function(n){
      if(n.event==='tabs-updated'){state.tabs=n.data.tabs;state.activeTabId=n.data.activeTabId;render();}
      else if(n.event==='reattach-tab'){delete state.detached[n.data.id];render();}
    },
    outcome:function(intent,o){
      if(intent.type==='detach'&&!o.ok){delete state.detached[intent.tabId];render();}
      if(intent.type==='reattach'&&!o.ok){delete state.detached[intent.tab.id];render();}
    },
    layout:function(px){document.documentElement.style.setProperty('--chrome',px+'px');}
  };
  window.ipc.postMessage(JSON.stringify({ready:true}));
})();
</script></body></html>"##;
